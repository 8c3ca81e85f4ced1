//! C source output
//!
//! Produces the value array, index array and `struct Animation` record the
//! engine's build compiles in, plus the table and `extern` declarations that
//! reference them.

use std::fmt::Write as _;

use anim_common::{AnimError, Animation, Result};

/// Entries per line in emitted arrays
const VALUES_PER_LINE: usize = 9;

/// Turn `name` into a C identifier
///
/// Non-alphanumeric characters become `_`; a leading digit gets a `_` prefix.
pub fn to_alnum(name: &str) -> Result<String> {
    if name.is_empty() {
        return Err(AnimError::MissingInput(
            "cannot derive a C identifier from an empty name".to_string(),
        ));
    }
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    Ok(ident)
}

fn short_array(out: &mut String, c_type: &str, name: &str, data: &[u16]) {
    let _ = write!(out, "static const {} {}[] = {{\n\t", c_type, name);
    for (i, value) in data.iter().enumerate() {
        let _ = write!(out, "0x{:04X}, ", value);
        if (i + 1) % VALUES_PER_LINE == 0 {
            out.push_str("\n\t");
        }
    }
    out.push_str("\n};\n");
}

/// Value array, index array and header record for `animation`
pub fn to_c(animation: &Animation) -> Result<String> {
    let name = to_alnum(animation.name())?;
    let header = animation.header();
    let tables = animation.tables();

    let mut out = String::new();
    short_array(&mut out, "s16", &format!("{}_values", name), tables.values());
    out.push('\n');
    short_array(
        &mut out,
        "u16",
        &format!("{}_indices", name),
        &tables.index_shorts(),
    );
    out.push('\n');
    let _ = write!(
        out,
        "static const struct Animation {name} = {{\n\
         \t{},\n\
         \t{},\n\
         \t0,\n\
         \t{},\n\
         \t{},\n\
         \tANIMINDEX_NUMPARTS({name}_indices),\n\
         \t{name}_values,\n\
         \t{name}_indices,\n\
         \t0,\n\
         }};\n",
        header.repetitions,
        header.y_offset,
        header.frame_start,
        header.last_frame,
        name = name,
    );
    out.push('\n');
    Ok(out)
}

/// `extern` declaration of an animation table
pub fn to_c_declaration(table_name: &str) -> Result<String> {
    Ok(format!(
        "extern const struct Animation *const {}[];\n",
        to_alnum(table_name)?
    ))
}

/// NULL-terminated table of animation pointers
pub fn animation_table<'a>(
    table_name: &str,
    animations: impl IntoIterator<Item = &'a str>,
) -> Result<String> {
    let mut out = format!(
        "const struct Animation *const {}[] = {{\n",
        to_alnum(table_name)?
    );
    for name in animations {
        let _ = writeln!(out, "\t&{},", to_alnum(name)?);
    }
    out.push_str("\tNULL,\n};\n");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anim_common::{AnimationOptions, AnimationRecorder};
    use std::f32::consts::FRAC_PI_2;

    fn wave() -> Animation {
        let mut recorder = AnimationRecorder::new(0, 1, 1.0).unwrap();
        let half = FRAC_PI_2 / 2.0;
        for rotation in [[0.0, 0.0, 0.0, 1.0], [half.sin(), 0.0, 0.0, half.cos()]] {
            recorder.record_frame([0.0; 3], &[rotation]).unwrap();
        }
        let options = AnimationOptions {
            looping: false,
            y_offset: 189,
        };
        Animation::build("mario wave", &recorder.finish().unwrap(), options).unwrap()
    }

    #[test]
    fn test_to_alnum() {
        assert_eq!(to_alnum("mario wave").unwrap(), "mario_wave");
        assert_eq!(to_alnum("anim-01.b").unwrap(), "anim_01_b");
        assert_eq!(to_alnum("2nd").unwrap(), "_2nd");
        assert!(matches!(to_alnum(""), Err(AnimError::MissingInput(_))));
    }

    #[test]
    fn test_to_c_layout() {
        let text = to_c(&wave()).unwrap();
        let expected = "static const s16 mario_wave_values[] = {\n\
                        \t0x0000, 0x0000, 0x0000, 0x0000, 0x4000, 0x0000, 0x0000, \n};\n\
                        \n\
                        static const u16 mario_wave_indices[] = {\n\
                        \t0x0001, 0x0000, 0x0001, 0x0001, 0x0001, 0x0002, 0x0002, 0x0003, 0x0001, \n\
                        \t0x0005, 0x0001, 0x0006, \n};\n\
                        \n\
                        static const struct Animation mario_wave = {\n\
                        \t1,\n\
                        \t189,\n\
                        \t0,\n\
                        \t0,\n\
                        \t1,\n\
                        \tANIMINDEX_NUMPARTS(mario_wave_indices),\n\
                        \tmario_wave_values,\n\
                        \tmario_wave_indices,\n\
                        \t0,\n\
                        };\n\
                        \n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_declarations() {
        assert_eq!(
            to_c_declaration("mario_anims").unwrap(),
            "extern const struct Animation *const mario_anims[];\n"
        );
        assert_eq!(
            animation_table("mario_anims", ["wave", "run"]).unwrap(),
            "const struct Animation *const mario_anims[] = {\n\t&wave,\n\t&run,\n\tNULL,\n};\n"
        );
    }
}
