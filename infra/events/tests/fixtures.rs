/// Shared payload type for bus tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestEvent(pub usize);
