//! International Morse code for navaid identifiers.

/// Dots and dashes for `text`, one group per character separated by spaces.
/// Characters without a code are shown bracketed, e.g. `[#]`.
pub fn morse_code(text: &str) -> String {
    text.chars()
        .map(|c| {
            let c = c.to_ascii_uppercase();
            symbol(c).map_or_else(|| format!("[{c}]"), str::to_string)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn symbol(c: char) -> Option<&'static str> {
    let code = match c {
        'A' => ".-",
        'B' => "-...",
        'C' => "-.-.",
        'D' => "-..",
        'E' => ".",
        'F' => "..-.",
        'G' => "--.",
        'H' => "....",
        'I' => "..",
        'J' => ".---",
        'K' => "-.-",
        'L' => ".-..",
        'M' => "--",
        'N' => "-.",
        'O' => "---",
        'P' => ".--.",
        'Q' => "--.-",
        'R' => ".-.",
        'S' => "...",
        'T' => "-",
        'U' => "..-",
        'V' => "...-",
        'W' => ".--",
        'X' => "-..-",
        'Y' => "-.--",
        'Z' => "--..",
        '1' => ".----",
        '2' => "..---",
        '3' => "...--",
        '4' => "....-",
        '5' => ".....",
        '6' => "-....",
        '7' => "--...",
        '8' => "---..",
        '9' => "----.",
        '0' => "-----",
        ',' => "--..--",
        '.' => ".-.-.-",
        '?' => "..--..",
        '/' => "-..-.",
        '-' => "-....-",
        '(' => "-.--.",
        ')' => "-.--.-",
        _ => return None,
    };
    Some(code)
}
