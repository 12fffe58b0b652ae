#[macro_export]
macro_rules! err {
    ($fmt:expr) => {
        $crate::Error::Other(anyhow::anyhow!($fmt))
    };
    ($fmt:expr, $($arg:tt)+) => {
        $crate::Error::Other(anyhow::anyhow!($fmt, $($arg)+))
    };
}

/// `malformed!(offset, "reason {}", arg)` builds an `Error::MalformedHeader`.
#[macro_export]
macro_rules! malformed {
    ($offset:expr, $fmt:expr) => {
        $crate::Error::MalformedHeader {
            offset: $offset,
            reason: format!($fmt),
        }
    };
    ($offset:expr, $fmt:expr, $($arg:tt)+) => {
        $crate::Error::MalformedHeader {
            offset: $offset,
            reason: format!($fmt, $($arg)+),
        }
    };
}
