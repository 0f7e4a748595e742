use console::Style;

pub fn print_header(title: &str) {
    println!("\n{}", Style::new().bold().cyan().apply_to(title));
    println!("{}", Style::new().dim().apply_to("─".repeat(console::measure_text_width(title))));
}

pub fn print_success(msg: &str) {
    println!("{} {}", Style::new().green().bold().apply_to("SUCCESS:"), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", Style::new().yellow().bold().apply_to("WARNING:"), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", Style::new().red().bold().apply_to("ERROR:"), msg);
}

pub fn print_panel(title: &str, content: &str, border_color: Style, content_style: Option<Style>) {
    let width: usize = 80;
    let title_len = console::measure_text_width(title);
    let padding = width.saturating_sub(title_len + 5);

    println!(
        "{} {} {}",
        border_color.apply_to("┌─"),
        Style::new().bold().apply_to(title),
        border_color.apply_to(format!("{}┐", "─".repeat(padding)))
    );

    let content_style = content_style.unwrap_or_else(Style::new);

    for line in content.lines() {
        for wrapped_line in textwrap::wrap(line, width - 4) {
            let display_line = wrapped_line.to_string();
            let space = (width - 4).saturating_sub(console::measure_text_width(&display_line));

            println!(
                "{} {} {}{}",
                border_color.apply_to("│"),
                content_style.apply_to(display_line),
                " ".repeat(space),
                border_color.apply_to("│")
            );
        }
    }
    println!("{}", border_color.apply_to(format!("└{}┘", "─".repeat(width - 2))));
}

pub fn print_key_value(key: &str, value: &str) {
    println!(
        "{}: {}",
        Style::new().dim().apply_to(key),
        Style::new().bold().apply_to(value)
    );
}

/// Left-aligns the first `left_columns` columns and right-aligns the rest.
pub fn print_table(headers: &[String], rows: &[Vec<String>], left_columns: usize) {
    let mut widths: Vec<usize> = headers.iter().map(|h| console::measure_text_width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(console::measure_text_width(cell));
            }
        }
    }

    let render = |cells: &[String]| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let width = widths.get(i).copied().unwrap_or(0);
                if i < left_columns {
                    format!("{:<width$}", cell, width = width)
                } else {
                    format!("{:>width$}", cell, width = width)
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    };

    let header_line = render(headers);
    println!("{}", Style::new().bold().apply_to(&header_line));
    println!("{}", Style::new().dim().apply_to("─".repeat(console::measure_text_width(&header_line))));
    for row in rows {
        println!("{}", render(row));
    }
}
