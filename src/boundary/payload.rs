//! Rendering of panic payloads into messages.

use std::any::Any;
use std::error::Error;

use crate::error::PanicError;

/// Try each listed type in turn and render the first match with `{:?}`.
macro_rules! describe_debug {
    ($payload:expr, $($ty:ty),+ $(,)?) => {
        $(
            if let Some(value) = $payload.downcast_ref::<$ty>() {
                return format!("{:?}", value);
            }
        )+
    };
}

/// Render a panic payload with as much detail as its type allows.
pub(crate) fn describe(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        return (*message).to_owned();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    if let Some(err) = payload.downcast_ref::<PanicError>() {
        return err.message().to_owned();
    }
    if let Some(err) = payload.downcast_ref::<Box<dyn Error + Send + Sync>>() {
        return error_chain(err.as_ref());
    }
    if let Some(err) = payload.downcast_ref::<std::io::Error>() {
        return error_chain(err);
    }
    describe_debug!(
        payload, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool,
        char,
    );
    "Box<dyn Any>".to_owned()
}

/// `outer: inner: innermost`
fn error_chain(err: &(dyn Error + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
