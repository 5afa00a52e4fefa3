//! End-to-end harvest tests against a mock storefront

mod harvest;
