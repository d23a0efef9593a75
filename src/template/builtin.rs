//! Jest templates compiled into the binary.

/// `(name, text)` pairs, addressed as `builtin:<name>`.
const BUILTINS: [(&str, &str); 3] = [
    (
        "jest/preamble",
        include_str!("../../templates/jest/preamble.js"),
    ),
    (
        "jest/testcase",
        include_str!("../../templates/jest/testcase.js"),
    ),
    (
        "jest/postamble",
        include_str!("../../templates/jest/postamble.js"),
    ),
];

pub fn builtin_template(name: &str) -> Option<&'static str> {
    BUILTINS
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, text)| *text)
}
