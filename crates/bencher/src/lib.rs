/// One benchmarked request shape: a path and the headers the gateway sends.
#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    request: TestRequest,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup, request: TestRequest) -> Self {
        Self { name, group, request }
    }

    pub fn small(name: &'static str, request: TestRequest) -> Self {
        Self::new(name, TestGroup::Small, request)
    }

    pub fn normal(name: &'static str, request: TestRequest) -> Self {
        Self::new(name, TestGroup::Normal, request)
    }

    pub fn large(name: &'static str, request: TestRequest) -> Self {
        Self::new(name, TestGroup::Large, request)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn request(&self) -> &TestRequest {
        &self.request
    }
}

#[derive(Debug, Copy, Clone)]
pub struct TestRequest {
    path: &'static str,
    headers: &'static [(&'static str, &'static str)],
}

impl TestRequest {
    pub const fn new(path: &'static str, headers: &'static [(&'static str, &'static str)]) -> Self {
        Self { path, headers }
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    pub fn headers(&self) -> &'static [(&'static str, &'static str)] {
        self.headers
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    Small,
    Normal,
    Large,
}
