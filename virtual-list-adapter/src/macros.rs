// Same shims as the core crate, under the `virtual_list_adapter` target.

#[cfg(feature = "tracing")]
macro_rules! alog {
    ($level:ident, $($tt:tt)*) => {
        tracing::$level!(target: "virtual_list_adapter", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! alog {
    ($level:ident, $($tt:tt)*) => {};
}

macro_rules! atrace {
    ($($tt:tt)*) => {
        alog!(trace, $($tt)*)
    };
}

macro_rules! adebug {
    ($($tt:tt)*) => {
        alog!(debug, $($tt)*)
    };
}
