use crate::domain::models::JsonOut;
use serde::Serialize;

pub fn print_json<T: Serialize>(ok: bool, data: T) -> anyhow::Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&JsonOut { ok, data })?
    );
    Ok(())
}

pub fn print_out<T: Serialize>(
    json: bool,
    data: &[T],
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        print_json(true, data)?;
    } else {
        for d in data {
            println!("{}", row(d));
        }
    }
    Ok(())
}

pub fn print_one<T: Serialize>(
    json: bool,
    data: T,
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        print_json(true, data)?;
    } else {
        println!("{}", row(&data));
    }
    Ok(())
}

/// Cuts `s` to `max` chars, appending an ellipsis when something was dropped.
pub fn ellipsize(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::ellipsize;

    #[test]
    fn ellipsize_counts_chars_not_bytes() {
        assert_eq!(ellipsize("short", 10), "short");
        assert_eq!(ellipsize("éééé", 2), "éé…");
    }
}
