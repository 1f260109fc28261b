//! Shared fixtures for the micro-input benchmarks.

/// Media types registered by the selection benchmarks, least specific first.
pub static REGISTRATIONS: &[&str] = &[
    "application/octet-stream",
    "text/plain",
    "application/json",
    "application/json; charset=utf-8",
    "application/x-www-form-urlencoded",
    "text/plain; format=flowed",
    "text/plain; format=flowed; delsp=yes",
    "multipart/form-data; boundary=\"----micro-input\"",
];

#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    header: &'static str,
}

impl TestCase {
    pub const fn new(name: &'static str, group: TestGroup, header: &'static str) -> Self {
        Self { name, group, header }
    }

    pub const fn small(name: &'static str, header: &'static str) -> Self {
        Self::new(name, TestGroup::Small, header)
    }

    pub const fn normal(name: &'static str, header: &'static str) -> Self {
        Self::new(name, TestGroup::Normal, header)
    }

    pub const fn large(name: &'static str, header: &'static str) -> Self {
        Self::new(name, TestGroup::Large, header)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn header(&self) -> &'static str {
        self.header
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    Small,
    Normal,
    Large,
}

/// `Content-Type` values of increasing size.
pub fn header_cases() -> Vec<TestCase> {
    vec![
        TestCase::small("bare_type", "application/json"),
        TestCase::normal("charset", "application/json; charset=UTF-8"),
        TestCase::normal("two_params", "text/plain; format=flowed; delsp=yes"),
        TestCase::large(
            "quoted_params",
            "multipart/form-data; boundary=\"----micro-input\"; charset=utf-8; name=\"a \\\"quoted\\\" value\"; x-trace=0123456789abcdef",
        ),
    ]
}
