//! Cross-module tests: console session, bootstrap, and a mocked backend.

mod relay_flow_test;
