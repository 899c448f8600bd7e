mod breaker_flow_test;
