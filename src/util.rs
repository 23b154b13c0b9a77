/// Checks that a numerical value is in the provided interval `[a,b]`, returning early with
/// [`Error::OutOfInterval`](crate::Error::OutOfInterval) if not
///
/// NaN is never in any interval.
///
/// ### Example
/// ```ignore
/// let alpha = 2.0;
/// ensure_interval!(alpha, 0.0, 1.0);
/// ```
/// This returns an error naming `alpha` and the interval `[0, 1]`.
#[macro_export]
macro_rules! ensure_interval {
    ($var:expr, $a:expr, $b:expr) => {
        if !($var >= $a && $var <= $b) {
            return Err($crate::Error::OutOfInterval {
                name: stringify!($var),
                value: $var,
                min: $a,
                max: $b,
            });
        }
    };
}
