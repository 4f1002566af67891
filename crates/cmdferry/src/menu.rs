use std::io::{BufRead, Write};

/// One entry of the interactive command catalog.
pub struct Template {
    pub number: u8,
    pub label: &'static str,
    pub prompts: &'static [&'static str],
}

pub const TEMPLATES: &[Template] = &[
    Template {
        number: 1,
        label: "Create directory",
        prompts: &["Directory name"],
    },
    Template {
        number: 2,
        label: "Create file",
        prompts: &["File name"],
    },
    Template {
        number: 3,
        label: "Copy file into directory",
        prompts: &["File name", "Destination directory"],
    },
    Template {
        number: 4,
        label: "Copy directory",
        prompts: &["Directory name", "Destination directory"],
    },
    Template {
        number: 5,
        label: "Move file or directory",
        prompts: &["File or directory name", "New directory name"],
    },
    Template {
        number: 6,
        label: "Copy file data to another file",
        prompts: &["Source file name", "Copy file name"],
    },
    Template {
        number: 7,
        label: "Change file or directory permissions",
        prompts: &["File or directory name", "Permission mode"],
    },
    Template {
        number: 8,
        label: "View file contents",
        prompts: &["File name"],
    },
    Template {
        number: 9,
        label: "List directory contents",
        prompts: &["Directory name"],
    },
    Template {
        number: 10,
        label: "Record accounting data to a file",
        prompts: &["Target file name", "Directory to account"],
    },
];

/// Menu number that ends the session without building a command.
pub const EXIT_CHOICE: u8 = 11;

/// Result of one interactive menu session.
///
/// Exit is an ordinary outcome handled by the caller, never a process
/// exit from inside the menu.
#[derive(Debug, PartialEq, Eq)]
pub enum MenuOutcome {
    Command(String),
    Exit,
}

/// Interpolate the chosen template with the collected inputs.
///
/// Returns `None` for an unknown choice or a wrong input count. Inputs
/// are wrapped in double quotes where they land inside the command, so
/// names with spaces survive the shell.
pub fn build_command(choice: u8, inputs: &[String]) -> Option<String> {
    match (choice, inputs) {
        (1, [dir]) => Some(format!("mkdir \"{dir}\"")),
        (2, [file]) => Some(format!("touch \"{file}\"")),
        (3, [file, dest]) => Some(format!("cp \"{file}\" \"{dest}/{file}\"")),
        (4, [dir, dest]) => Some(format!("cp -r \"{dir}\" \"{dest}\"")),
        (5, [name, dest]) => Some(format!("mv \"{name}\" \"{dest}\"")),
        (6, [src, copy]) => Some(format!("cp \"{src}\" \"{copy}\"")),
        (7, [name, mode]) => Some(format!("chmod {mode} \"{name}\"")),
        (8, [file]) => Some(format!("cat \"{file}\"")),
        (9, [dir]) => Some(format!("ls -al \"{dir}\"")),
        (10, [file, dir]) => Some(format!("echo \"{dir} - $(ls -l \"{dir}\")\" > \"{file}\"")),
        _ => None,
    }
}

/// Run the interactive menu until a command is built or exit is chosen.
///
/// End-of-input counts as exit, so a closed stdin never loops forever.
pub fn prompt_loop<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> std::io::Result<MenuOutcome> {
    loop {
        print_menu(output)?;

        let Some(line) = read_line(input)? else {
            return Ok(MenuOutcome::Exit);
        };

        let Ok(choice) = line.trim().parse::<u8>() else {
            writeln!(output, "Such action is not defined. Try again.")?;
            continue;
        };

        if choice == EXIT_CHOICE {
            return Ok(MenuOutcome::Exit);
        }

        let Some(template) = TEMPLATES.iter().find(|t| t.number == choice) else {
            writeln!(output, "Such action is not defined. Try again.")?;
            continue;
        };

        let mut inputs = Vec::with_capacity(template.prompts.len());
        for prompt in template.prompts {
            write!(output, "{prompt}: ")?;
            output.flush()?;
            let Some(value) = read_line(input)? else {
                return Ok(MenuOutcome::Exit);
            };
            inputs.push(value.trim().to_string());
        }

        if let Some(command) = build_command(choice, &inputs) {
            return Ok(MenuOutcome::Command(command));
        }
    }
}

fn print_menu<W: Write>(output: &mut W) -> std::io::Result<()> {
    writeln!(output, "\nMake the appropriate selection:")?;
    for template in TEMPLATES {
        writeln!(output, " {:>2}. {}", template.number, template.label)?;
    }
    writeln!(output, " {EXIT_CHOICE:>2}. Exit")?;
    write!(output, "\nYour choice: ")?;
    output.flush()
}

fn read_line<R: BufRead>(input: &mut R) -> std::io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}
