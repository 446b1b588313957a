//! Macros for reducing provider and call boilerplate.
//!
//! - [`provider_object!`](crate::provider_object): build a nested provider
//!   tree from a literal member list
//! - [`remote_call!`](crate::remote_call): spell a remote call as a chained
//!   member path instead of a path string

/// Build a nested [`ProviderObject`](crate::ProviderObject) from a literal
/// member tree.
///
/// Function members take any closure accepted by
/// [`ProviderObject::function`](crate::ProviderObject::function); nested
/// braces declare nested objects.
///
/// # Example
///
/// ```rust
/// use farcall::{CallFault, provider_object};
/// use serde_json::{Value, json};
///
/// let provider = provider_object! {
///     echo: |mut args: Vec<Value>| async move {
///         Ok(args.pop().unwrap_or(Value::Null))
///     },
///     math: {
///         add: |args: Vec<Value>| async move {
///             let a = args[0].as_i64().ok_or_else(|| CallFault::error("not a number"))?;
///             let b = args[1].as_i64().ok_or_else(|| CallFault::error("not a number"))?;
///             Ok(json!(a + b))
///         },
///     },
/// };
/// assert!(provider.get("math").is_some());
/// ```
#[macro_export]
macro_rules! provider_object {
    (@build $object:expr, ) => { $object };
    (@build $object:expr, $name:ident : { $($inner:tt)* } $(, $($rest:tt)*)? ) => {
        $crate::provider_object!(@build
            $object.object(stringify!($name), $crate::provider_object! { $($inner)* }),
            $($($rest)*)?
        )
    };
    (@build $object:expr, $name:ident : $function:expr $(, $($rest:tt)*)? ) => {
        $crate::provider_object!(@build
            $object.function(stringify!($name), $function),
            $($($rest)*)?
        )
    };
    ( $($members:tt)* ) => {
        $crate::provider_object!(@build $crate::ProviderObject::new(), $($members)*)
    };
}

/// Spell a remote call as a chained member path.
///
/// `remote_call!(driver => math.add(2, 3))` expands to
/// `driver.path("math.add").call(vec![json!(2), json!(3)])` and evaluates to
/// the call future; `.await` it for the result. Arguments are serialized
/// with [`serde_json::json!`], so anything `Serialize` works.
///
/// # Example
///
/// ```ignore
/// let sum = remote_call!(driver => math.add(2, 3)).await?;
/// let echoed = remote_call!(driver => echo("hello")).await?;
/// ```
#[macro_export]
macro_rules! remote_call {
    ( $driver:expr => $first:ident $(. $segment:ident)* ( $($argument:expr),* $(,)? ) ) => {
        $driver
            .path(concat!(stringify!($first) $(, ".", stringify!($segment))*))
            .call(vec![ $( $crate::__serde_json::json!($argument) ),* ])
    };
}
