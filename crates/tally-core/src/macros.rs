/// Builds a [`ValueMap`](crate::stmt::ValueMap) from `key => value` pairs,
/// preserving the order the keys are written in.
#[macro_export]
macro_rules! values {
    () => {
        $crate::stmt::ValueMap::new()
    };
    (
        $( $key:expr => $value:expr ),+ $(,)?
    ) => {{
        let mut map = $crate::stmt::ValueMap::new();
        $( map.insert($key, $value); )+
        map
    }};
}
