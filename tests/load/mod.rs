mod soak_test;
