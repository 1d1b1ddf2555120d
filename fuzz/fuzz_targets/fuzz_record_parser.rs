// fuzz/fuzz_targets/fuzz_record_parser.rs
#![no_main]

use libfuzzer_sys::fuzz_target;
use pointer_trace::event::read_record;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let mut reader = Cursor::new(data);
    let mut line_no = 0u64;
    // Non-UTF-8 input surfaces as an io::Error; any other outcome must not panic.
    while let Ok(Some(_record)) = read_record(&mut reader, &mut line_no) {}
});
