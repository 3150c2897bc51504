mod normalizer_tests;
mod pipeline_tests;
mod plan_tests;
