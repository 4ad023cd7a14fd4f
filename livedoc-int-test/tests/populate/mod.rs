mod tree_test;
