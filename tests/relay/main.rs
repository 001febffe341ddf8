mod fake_vendor;
mod round_trip_tests;
