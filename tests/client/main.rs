mod fakes;
mod file_store_tests;
mod identity_switch_tests;
mod image_studio_tests;
