//! Wire-stable codes shared with every deployed client

use types::{CodeError, DomainFailure, Opcode, StatusCode};

#[test]
fn test_opcodes_are_stable() {
    let expected = [
        (0, Opcode::CachedReply),
        (1, Opcode::CreateAccount),
        (2, Opcode::Deposit),
        (3, Opcode::Withdraw),
        (4, Opcode::CloseAccount),
        (5, Opcode::Transfer),
        (6, Opcode::StartMonitoring),
        (7, Opcode::BalanceQuery),
        (8, Opcode::StopMonitoring),
    ];
    for (code, opcode) in expected {
        assert_eq!(opcode.code(), code);
        assert_eq!(Opcode::try_from(code), Ok(opcode));
    }
    assert_eq!(Opcode::try_from(9), Err(CodeError::UnknownOpcode(9)));
}

#[test]
fn test_failures_map_to_status_codes() {
    for failure in [
        DomainFailure::NotFound,
        DomainFailure::Unauthorized,
        DomainFailure::Insufficient,
    ] {
        let status = failure.status();
        assert!(!status.is_ok());
        assert_eq!(DomainFailure::from_status(status), Some(failure));
    }
    assert_eq!(StatusCode::Unauthorized.code(), 401);
    assert_eq!(StatusCode::Insufficient.code(), 402);
    assert_eq!(DomainFailure::from_status(StatusCode::Ok), None);
}
