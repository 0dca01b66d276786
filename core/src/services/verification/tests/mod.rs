mod cleanup_tests;
mod generator_tests;
