//! Inclusive bounds checking for wire fields with fixed-width encodings.

/// Enforces that a number is within the inclusive \[`$lower`, `$upper`\]
/// bounds, producing an [`std::io::Error`] naming the offending expression
/// otherwise.
#[macro_export]
macro_rules! range_check {
    ($n:expr, $lower:expr, $upper:expr) => {{
        let n = $n;

        #[allow(unused_comparisons, clippy::manual_range_contains)]
        if n < $lower || n > $upper {
            ::std::result::Result::Err(::std::io::Error::new(
                ::std::io::ErrorKind::InvalidData,
                format!(
                    "{} is out of range [{}, {}]: {}",
                    stringify!($n),
                    $lower,
                    $upper,
                    n
                ),
            ))
        } else {
            ::std::result::Result::Ok(())
        }
    }};
}
