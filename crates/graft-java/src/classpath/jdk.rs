//! The JDK classes every classpath starts with.

use super::{ClassInfo, OBJECT};

const TIME_UNIT: &str = "java.util.concurrent.TimeUnit";
const DURATION: &str = "java.time.Duration";
const STRING: &str = "java.lang.String";

/// Boxed primitive wrappers and the primitive each one holds.
const BOXES: &[(&str, &str)] = &[
    ("boolean", "java.lang.Boolean"),
    ("byte", "java.lang.Byte"),
    ("char", "java.lang.Character"),
    ("short", "java.lang.Short"),
    ("int", "java.lang.Integer"),
    ("long", "java.lang.Long"),
    ("float", "java.lang.Float"),
    ("double", "java.lang.Double"),
];

/// Returns the wrapper class of a primitive.
pub(crate) fn boxed(primitive: &str) -> Option<&'static str> {
    BOXES
        .iter()
        .find(|(name, _)| *name == primitive)
        .map(|(_, wrapper)| *wrapper)
}

/// Returns the primitive held by a wrapper class.
pub(crate) fn unboxed(wrapper: &str) -> Option<&'static str> {
    BOXES
        .iter()
        .find(|(_, name)| *name == wrapper)
        .map(|(primitive, _)| *primitive)
}

pub(super) fn baseline() -> Vec<ClassInfo> {
    let mut classes = vec![
        ClassInfo::class(OBJECT)
            .constructor(&[])
            .method("toString", &[], STRING)
            .method("equals", &[OBJECT], "boolean")
            .method("hashCode", &[], "int")
            .method("getClass", &[], "java.lang.Class"),
        ClassInfo::class("java.lang.Class").method("getName", &[], STRING),
        ClassInfo::interface("java.lang.CharSequence").method("length", &[], "int"),
        ClassInfo::interface("java.lang.Comparable"),
        ClassInfo::interface("java.lang.Runnable").method("run", &[], "void"),
        ClassInfo::class(STRING)
            .extends("java.lang.CharSequence")
            .extends("java.lang.Comparable")
            .constructor(&[])
            .constructor(&[STRING])
            .method("length", &[], "int")
            .method("isEmpty", &[], "boolean")
            .method("trim", &[], STRING)
            .method("substring", &["int"], STRING)
            .method("substring", &["int", "int"], STRING)
            .method("equals", &[OBJECT], "boolean")
            .static_method("valueOf", &[OBJECT], STRING),
        ClassInfo::class("java.lang.StringBuilder")
            .extends("java.lang.CharSequence")
            .constructor(&[])
            .method("append", &[OBJECT], "java.lang.StringBuilder")
            .method("toString", &[], STRING),
        ClassInfo::class("java.lang.Number")
            .method("intValue", &[], "int")
            .method("longValue", &[], "long"),
        ClassInfo::class("java.lang.Enum")
            .extends("java.lang.Comparable")
            .method("name", &[], STRING)
            .method("ordinal", &[], "int"),
        ClassInfo::class("java.lang.Thread")
            .extends("java.lang.Runnable")
            .constructor(&["java.lang.Runnable"])
            .static_method("sleep", &["long"], "void")
            .method("start", &[], "void")
            .method("join", &["long"], "void"),
        ClassInfo::class("java.lang.System").static_method("currentTimeMillis", &[], "long"),
        ClassInfo::annotation("java.lang.Override"),
        ClassInfo::annotation("java.lang.Deprecated"),
        ClassInfo::annotation("java.lang.FunctionalInterface"),
        ClassInfo::annotation("java.lang.SuppressWarnings").method("value", &[], "java.lang.String[]"),
        ClassInfo::interface("java.util.Collection")
            .method("size", &[], "int")
            .method("isEmpty", &[], "boolean")
            .method("add", &[OBJECT], "boolean"),
        ClassInfo::interface("java.util.List")
            .extends("java.util.Collection")
            .method("get", &["int"], OBJECT),
        ClassInfo::class("java.util.ArrayList")
            .extends("java.util.List")
            .constructor(&[])
            .constructor(&["int"]),
        ClassInfo::enumeration(TIME_UNIT)
            .extends("java.lang.Enum")
            .method("toMillis", &["long"], "long")
            .method("toSeconds", &["long"], "long")
            .method("sleep", &["long"], "void"),
        ClassInfo::class(DURATION)
            .static_method("ofMillis", &["long"], DURATION)
            .static_method("ofSeconds", &["long"], DURATION)
            .static_method("of", &["long", "java.time.temporal.TemporalUnit"], DURATION)
            .method("toMillis", &[], "long"),
        ClassInfo::interface("java.time.temporal.TemporalUnit"),
    ];

    let constants = [
        "NANOSECONDS",
        "MICROSECONDS",
        "MILLISECONDS",
        "SECONDS",
        "MINUTES",
        "HOURS",
        "DAYS",
    ];
    if let Some(unit) = classes.iter_mut().find(|info| info.fqn() == TIME_UNIT) {
        *unit = constants
            .iter()
            .fold(unit.clone(), |info, name| info.constant(name));
    }

    classes.extend(BOXES.iter().map(|&(primitive, boxed)| {
        let base = if matches!(primitive, "boolean" | "char") {
            OBJECT
        } else {
            "java.lang.Number"
        };
        ClassInfo::class(boxed)
            .extends(base)
            .extends("java.lang.Comparable")
            .static_method("valueOf", &[primitive], boxed)
    }));
    classes
}
