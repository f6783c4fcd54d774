use anyhow::{Context, Result, bail};

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse a comma-separated list of die face counts, keeping first-seen order
/// and dropping duplicates. `a-b` expands to the inclusive range.
pub fn parse_sides(s: &str) -> Result<Vec<u32>> {
    let mut sides: Vec<u32> = Vec::new();
    for token in split_csv(s) {
        let expanded = if let Some((lo, hi)) = token.split_once('-') {
            let lo: u32 = lo
                .trim()
                .parse()
                .with_context(|| format!("invalid range start in `{token}`"))?;
            let hi: u32 = hi
                .trim()
                .parse()
                .with_context(|| format!("invalid range end in `{token}`"))?;
            if lo > hi {
                bail!("range `{token}` is reversed");
            }
            (lo..=hi).collect::<Vec<_>>()
        } else {
            vec![
                token
                    .parse()
                    .with_context(|| format!("invalid die size `{token}`"))?,
            ]
        };
        for value in expanded {
            if !sides.contains(&value) {
                sides.push(value);
            }
        }
    }
    if sides.is_empty() {
        bail!("no die sizes given");
    }
    Ok(sides)
}
