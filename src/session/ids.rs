/// Typed identifier generation for session-subsystem rows
///
/// Identifiers are UUIDv7 in simple (hex) form behind a human-readable
/// type prefix, e.g. `sess_018f2c7be4a27d3e9c41b2a6f0d41c55`. UUIDv7 is
/// time-ordered, so ids sort lexically in creation order within a prefix.
use uuid::Uuid;

/// Kinds of identifiers minted by this subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Session,
    RefreshToken,
}

impl IdKind {
    pub fn prefix(self) -> &'static str {
        match self {
            IdKind::Session => "sess",
            IdKind::RefreshToken => "rtoken",
        }
    }
}

/// Generate a new identifier of the given kind.
///
/// Infallible under normal operation; the process aborts only if the
/// system clock/entropy source is unavailable, which uuid treats as fatal.
pub fn generate(kind: IdKind) -> String {
    format!("{}_{}", kind.prefix(), Uuid::now_v7().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_carry_their_kind_prefix() {
        assert!(generate(IdKind::Session).starts_with("sess_"));
        assert!(generate(IdKind::RefreshToken).starts_with("rtoken_"));
    }

    #[test]
    fn ids_are_unique() {
        let a = generate(IdKind::Session);
        let b = generate(IdKind::Session);
        assert_ne!(a, b);
    }

    #[test]
    fn ids_sort_in_creation_order() {
        let mut minted = Vec::new();
        for _ in 0..5 {
            minted.push(generate(IdKind::RefreshToken));
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
        let mut sorted = minted.clone();
        sorted.sort();
        assert_eq!(minted, sorted);
    }
}
