#![no_main]

use libfuzzer_sys::fuzz_target;
use sufi::fuzz::fm_index::{harness, Data};

fuzz_target!(|data: Data| harness(data));
