mod flat_list_tests;
mod tree_tests;
