mod tiling_tests;
