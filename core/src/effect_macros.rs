//! Declarative macros for building effects.

/// Create an `Effect::Future` from the body of an async block
///
/// The body is moved into the future, so clone shared handles before
/// invoking the macro.
///
/// # Example
///
/// ```
/// use photo_booking_core::{async_effect, effect::Effect};
///
/// let slot = 3_u32;
/// let effect: Effect<u32> = async_effect! {
///     Some(slot + 1)
/// };
/// assert!(matches!(effect, Effect::Future(_)));
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}
