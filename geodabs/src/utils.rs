#[doc(hidden)]
#[macro_export]
macro_rules! assert_eq_float {
    ($a:expr, $b:expr) => {
        assert_eq_float!($a, $b, 0.00001);
    };
    ($a:expr, $b:expr, $eps:expr) => {
        assert!(($a - $b).abs() < $eps);
    };
}
