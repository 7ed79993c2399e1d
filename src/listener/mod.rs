pub mod observer;
pub mod pattern;
pub mod registry;
pub mod sink;

pub use observer::{log_line, observe, ObservedEffect, RequestObserver};
pub use pattern::{MatchPattern, PatternError, PatternSet};
pub use registry::{
    register, Dispatch, EventBus, ExtraInfoSpec, HostRuntime, ListenerId, RequestFilter,
};
pub use sink::{LogSink, MemorySink, StderrSink, StdoutSink, TracingSink};
