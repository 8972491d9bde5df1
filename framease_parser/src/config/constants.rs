pub mod compile_time {
    pub mod file_processing {
        /// Maximum configuration dump size accepted by the loader (64MB)
        /// SECURITY: Prevents memory exhaustion via oversized uploads
        pub const MAX_FILE_SIZE: u64 = 64 * 1024 * 1024;

        /// Threshold for logging a dump as "large" (4MB)
        pub const LARGE_FILE_THRESHOLD: u64 = 4 * 1024 * 1024;
    }

    pub mod lexical {
        /// Maximum length of a logical line assembled from quoted continuations (1MB)
        /// SECURITY: Bounds the cost of an unterminated quote swallowing the dump
        pub const MAX_LOGICAL_LINE_LENGTH: usize = 1_048_576;
    }

    pub mod syntax {
        /// Maximum depth of nested config/edit contexts
        /// SECURITY: Prevents unbounded path stacks on malformed input
        pub const MAX_CONTEXT_DEPTH: usize = 64;
    }

    pub mod logging {
        /// Number of events retained by the in-memory logger
        pub const EVENT_BUFFER_SIZE: usize = 10_000;

        /// Maximum length of a single log message in bytes
        pub const MAX_LOG_MESSAGE_LENGTH: usize = 4096;
    }
}

#[cfg(test)]
mod tests {
    use super::compile_time;

    #[test]
    fn test_limits_are_consistent() {
        assert!(
            compile_time::file_processing::LARGE_FILE_THRESHOLD
                < compile_time::file_processing::MAX_FILE_SIZE
        );
        assert!(compile_time::syntax::MAX_CONTEXT_DEPTH >= 8);
        assert!(compile_time::logging::EVENT_BUFFER_SIZE >= 100);
    }
}
