/// Builds a [`Value`](crate::Value) with TOML-like literal syntax.
///
/// Arrays use `[...]`, tables use `{ "key": value, ... }` and anything
/// else is converted with `Value::from`. Tables built here are inline
/// tables.
///
/// ```rust
/// use unreal_toml::{toml, Value};
///
/// let server = toml!({
///     "host": "localhost",
///     "ports": [8080, 8081],
///     "tls": { "enabled": false }
/// });
/// assert_eq!(server.as_table().unwrap().at_path_as::<i64>("ports[1]").unwrap(), 8081);
/// assert_eq!(toml!(1.5), Value::from(1.5));
/// ```
#[macro_export]
macro_rules! toml {
    ([]) => {
        $crate::Value::Array($crate::Array::new())
    };

    ([ $($elem:tt),* $(,)? ]) => {{
        let mut array = $crate::Array::new();
        $(
            array.push($crate::toml!($elem));
        )*
        $crate::Value::Array(array)
    }};

    ({}) => {
        $crate::Value::Table($crate::Table::inline())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut table = $crate::Table::inline();
        $(
            table.insert($key, $crate::toml!($value));
        )*
        $crate::Value::Table(table)
    }};

    ($e:expr) => {
        $crate::Value::from($e)
    };
}
