use crate::model::{BookingStatus, Role};

use super::EngineError;

/// Same wording for the cancel-transition and the remove path.
pub(crate) const CONTACT_ADMIN: &str =
    "a confirmed booking can only be cancelled by an admin; contact an admin";

/// The status state machine. Pending is the only non-terminal state:
///
///   pending -> confirmed | rejected | cancelled
///   confirmed -> rejected | cancelled
///
/// Everything else (terminal source, self-transition, anything back to
/// pending) is impossible for every role and fails with InvalidTransition.
/// A transition some role could make but this caller may not fails with
/// Permission.
pub fn authorize_transition(
    from: BookingStatus,
    to: BookingStatus,
    role: Role,
    is_owner: bool,
) -> Result<(), EngineError> {
    use BookingStatus::*;

    match (from, to) {
        (Pending, Confirmed) => {
            if role.is_admin() {
                Ok(())
            } else {
                Err(EngineError::Permission("only an admin can confirm a booking"))
            }
        }
        (Pending, Rejected) | (Confirmed, Rejected) => {
            if role.is_admin() {
                Ok(())
            } else {
                Err(EngineError::Permission("only an admin can reject a booking"))
            }
        }
        (Pending, Cancelled) => {
            if role.is_admin() || is_owner {
                Ok(())
            } else {
                Err(EngineError::Permission("you can only cancel your own booking"))
            }
        }
        (Confirmed, Cancelled) => {
            if role.is_admin() {
                Ok(())
            } else {
                Err(EngineError::Permission(CONTACT_ADMIN))
            }
        }
        (from, to) => Err(EngineError::InvalidTransition { from, to }),
    }
}

/// Physical removal. Owners may remove their own bookings except confirmed
/// ones, which only an admin may touch.
pub fn authorize_removal(
    status: BookingStatus,
    role: Role,
    is_owner: bool,
) -> Result<(), EngineError> {
    if !role.is_admin() && !is_owner {
        return Err(EngineError::Permission(
            "you do not have permission to delete this booking",
        ));
    }
    if status == BookingStatus::Confirmed && !role.is_admin() {
        return Err(EngineError::Permission(CONTACT_ADMIN));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use BookingStatus::*;

    const ALL: [BookingStatus; 4] = [Pending, Confirmed, Rejected, Cancelled];

    #[test]
    fn admin_confirms_pending() {
        assert!(authorize_transition(Pending, Confirmed, Role::Admin, false).is_ok());
    }

    #[test]
    fn owner_cannot_confirm_own_pending() {
        let err = authorize_transition(Pending, Confirmed, Role::User, true).unwrap_err();
        assert!(matches!(err, EngineError::Permission(_)));
    }

    #[test]
    fn admin_rejects_pending_and_confirmed() {
        assert!(authorize_transition(Pending, Rejected, Role::Admin, false).is_ok());
        assert!(authorize_transition(Confirmed, Rejected, Role::Admin, false).is_ok());
    }

    #[test]
    fn user_cannot_reject() {
        for from in [Pending, Confirmed] {
            let err = authorize_transition(from, Rejected, Role::User, true).unwrap_err();
            assert!(matches!(err, EngineError::Permission(_)));
        }
    }

    #[test]
    fn owner_cancels_own_pending() {
        assert!(authorize_transition(Pending, Cancelled, Role::User, true).is_ok());
    }

    #[test]
    fn non_owner_cannot_cancel_pending() {
        let err = authorize_transition(Pending, Cancelled, Role::User, false).unwrap_err();
        assert!(matches!(err, EngineError::Permission(_)));
    }

    #[test]
    fn owner_cannot_cancel_confirmed() {
        let err = authorize_transition(Confirmed, Cancelled, Role::User, true).unwrap_err();
        match err {
            EngineError::Permission(msg) => assert_eq!(msg, CONTACT_ADMIN),
            other => panic!("expected Permission, got {other:?}"),
        }
    }

    #[test]
    fn admin_cancels_confirmed() {
        assert!(authorize_transition(Confirmed, Cancelled, Role::Admin, false).is_ok());
    }

    #[test]
    fn terminal_states_have_no_exits() {
        // Even an admin who owns the booking cannot leave a terminal state.
        for from in [Rejected, Cancelled] {
            for to in ALL {
                let err = authorize_transition(from, to, Role::Admin, true).unwrap_err();
                assert!(
                    matches!(err, EngineError::InvalidTransition { .. }),
                    "{from} -> {to} should be invalid"
                );
            }
        }
    }

    #[test]
    fn nothing_returns_to_pending() {
        for from in ALL {
            let err = authorize_transition(from, Pending, Role::Admin, true).unwrap_err();
            assert!(matches!(err, EngineError::InvalidTransition { .. }));
        }
    }

    #[test]
    fn self_transitions_are_invalid() {
        for status in ALL {
            let err = authorize_transition(status, status, Role::Admin, true).unwrap_err();
            assert!(matches!(err, EngineError::InvalidTransition { .. }));
        }
    }

    #[test]
    fn owner_removes_own_pending() {
        assert!(authorize_removal(Pending, Role::User, true).is_ok());
    }

    #[test]
    fn non_owner_cannot_remove() {
        let err = authorize_removal(Pending, Role::User, false).unwrap_err();
        assert!(matches!(err, EngineError::Permission(_)));
    }

    #[test]
    fn owner_cannot_remove_confirmed() {
        let err = authorize_removal(Confirmed, Role::User, true).unwrap_err();
        match err {
            EngineError::Permission(msg) => assert_eq!(msg, CONTACT_ADMIN),
            other => panic!("expected Permission, got {other:?}"),
        }
    }

    #[test]
    fn admin_removes_anything() {
        for status in ALL {
            assert!(authorize_removal(status, Role::Admin, false).is_ok());
        }
    }

    #[test]
    fn owner_removes_own_terminal_bookings() {
        for status in [Rejected, Cancelled] {
            assert!(authorize_removal(status, Role::User, true).is_ok());
        }
    }
}
