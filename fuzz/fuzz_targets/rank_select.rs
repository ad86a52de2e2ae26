#![no_main]

use libfuzzer_sys::fuzz_target;
use sufi::fuzz::rank_select::{harness, Data};

fuzz_target!(|data: Data| harness(data));
