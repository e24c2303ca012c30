//! Declarative macros for ergonomic effect construction

/// Create an `Effect::Delay` for scheduling delayed actions
///
/// # Example
///
/// ```rust,ignore
/// use taskdeck_core::delay;
/// use std::time::Duration;
///
/// delay! {
///     duration: Duration::from_secs(4),
///     action: NotificationAction::Expire(id)
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}

/// Create a delayed action that can be cancelled by id
///
/// Expands to an `Effect::Cancellable` wrapping an `Effect::Delay`.
///
/// # Example
///
/// ```rust,ignore
/// use taskdeck_core::timer;
///
/// timer! {
///     id: EffectId::new("notification-7"),
///     after: Duration::from_millis(4000),
///     action: NotificationAction::Expire(id)
/// }
/// ```
#[macro_export]
macro_rules! timer {
    (
        id: $id:expr,
        after: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Cancellable {
            id: $id,
            effect: ::std::boxed::Box::new($crate::delay! {
                duration: $duration,
                action: $action
            }),
        }
    };
}
