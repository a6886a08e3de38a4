mod legacy_env_tests;
