#![no_main]

use libfuzzer_sys::fuzz_target;
use pdfforge::selection::parse_page_range;

fuzz_target!(|data: &[u8]| {
    let Some((&max, rest)) = data.split_first() else {
        return;
    };
    let expression = String::from_utf8_lossy(rest);
    let max_page = usize::from(max);

    let selection = parse_page_range(&expression, max_page);

    // Always ascending, unique, and inside the document.
    assert!(selection.pages().windows(2).all(|w| w[0] < w[1]));
    assert!(
        selection
            .pages()
            .iter()
            .all(|&page| page >= 1 && page as usize <= max_page)
    );
});
