mod utils;

mod fetcher_tests;
