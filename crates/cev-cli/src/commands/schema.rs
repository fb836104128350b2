use cev_core::error::CevError;
use cev_core::schema::{registry, FieldKind, LinePick, PageSchema};

pub fn run(page: Option<usize>) -> Result<(), CevError> {
    let reg = registry();
    let pages: Vec<&PageSchema> = match page {
        Some(p) => vec![reg.schema_for(p)?],
        None => reg.pages().iter().collect(),
    };

    println!("{} v{} (at least {} pages)", reg.format(), reg.version(), reg.min_pages());
    let anchor = reg.anchor();
    println!(
        "  title area: page {}, [{}, {}, {}, {}] mm, accepts {}",
        anchor.page,
        anchor.region.x0,
        anchor.region.y0,
        anchor.region.x1,
        anchor.region.y1,
        anchor.titles.join(" | ")
    );

    for schema in pages {
        println!();
        println!("=== Pagina{}: {} ===", schema.page, schema.title);
        if schema.is_stub() {
            println!("  (no fields on this page)");
            continue;
        }

        let key_width = schema.keys().map(|k| k.len()).max().unwrap_or(10);
        for field in &schema.fields {
            let r = &field.region;
            println!(
                "  {:<width$}  {:<8} {:<13} [{:>5.1}, {:>5.1}, {:>5.1}, {:>5.1}]{}  {}",
                field.key,
                kind_name(field.kind),
                pick_name(field.pick),
                r.x0,
                r.y0,
                r.x1,
                r.y1,
                if field.required { " *" } else { "  " },
                field.label,
                width = key_width
            );
        }
        for derived in &schema.derived {
            println!(
                "  {:<width$}  derived from {}  {}",
                derived.key,
                derived.source,
                derived.label,
                width = key_width
            );
        }
    }

    Ok(())
}

fn kind_name(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Text => "text",
        FieldKind::Numeric => "numeric",
        FieldKind::Date => "date",
        FieldKind::Enum => "enum",
    }
}

fn pick_name(pick: LinePick) -> &'static str {
    match pick {
        LinePick::Joined => "joined",
        LinePick::FirstLine => "first_line",
        LinePick::LastLine => "last_line",
        LinePick::FirstInteger => "first_integer",
    }
}
