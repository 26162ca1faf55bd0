mod tuning_tests;
