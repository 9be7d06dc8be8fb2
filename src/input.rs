use std::io::Write;

/// prompts and reads a single line from stdin. `None` is returned once stdin
/// is closed.
pub fn read_line<P>(prompt: P) -> std::io::Result<Option<String>>
where
    P: AsRef<str>
{
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let mut buffer = String::new();

    stdout.write_all(prompt.as_ref().as_bytes())?;
    stdout.flush()?;

    if stdin.read_line(&mut buffer)? == 0 {
        return Ok(None);
    }

    Ok(Some(buffer))
}
