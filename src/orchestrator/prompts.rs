/// Prompt templates for the generation workflow
///
/// All prompts used to interact with the generation CLI live here,
/// parameterized by requirements text, file path, description, and feedback.
/// Boundary constraints for per-file generation calls.
///
/// Each call is scoped to exactly one file: no cross-file content, no
/// commentary, no installation instructions.
const FILE_BOUNDARY: &str = r#"### Constraints
- **Only generate code for this specific file.**
- **Do not generate code for any other files.**
- **Strictly adhere to the requirements extracted from the description.**
- **Do not assume or add extra functionality beyond what is specified.**
- **Use clear and concise variable and function names.**
- **Ensure modularity and error handling but avoid unnecessary abstractions.**
- **Include only relevant docstrings and comments.**
- **Do not include install commands, shell commands, or notes of any kind.**
- **Return only the source code. No extra text before or after.**"#;

/// Ask the planner for a file tree and per-file descriptions.
pub fn plan_prompt(requirements_text: &str) -> String {
    format!(
        r#"You are a software architect. Given the following requirements document:

{requirements_text}

- Generate a structured file tree for the project.
- Provide a detailed description of each file's purpose and contents:
  the classes it should define and what each does, the key variables with
  their purpose and type, and the methods with their inputs, outputs, and
  side effects.
- Do not plan test files; tests are generated separately.
- Return a JSON object inside a ```json fenced block with:
  - 'files': list of file paths.
  - 'descriptions': dictionary mapping each file path to its description.
- Ensure the fenced block contains valid JSON and nothing else.
"#,
        requirements_text = requirements_text
    )
}

/// Generate the full content of one planned file from its description.
pub fn write_file_prompt(path: &str, description: &str) -> String {
    format!(
        r#"You are a senior developer. Generate a complete source file based **only** on the following description:

{description}

File path: {path}

{boundary}
"#,
        description = description,
        path = path,
        boundary = FILE_BOUNDARY
    )
}

/// Critique one file's current content. When the file failed at runtime,
/// the error output is included so the critique addresses it.
pub fn review_prompt(path: &str, code: &str, execution_error: Option<&str>) -> String {
    let error_section = match execution_error {
        Some(error) => format!(
            "\nThe file failed when executed. Error output:\n```\n{}\n```\nPrioritize the exact modifications that resolve this error.\n",
            error
        ),
        None => String::new(),
    };

    format!(
        r#"You are a senior software reviewer. Analyze the following code from {path}:
```
{code}
```
{error_section}- Identify any missing logic.
- Suggest improvements (performance, best practices, security).
- List the exact modifications required.
"#,
        path = path,
        code = code,
        error_section = error_section
    )
}

/// Regenerate one file's content applying review feedback.
pub fn improve_prompt(path: &str, code: &str, feedback: &str) -> String {
    format!(
        r#"You are a senior software engineer. Improve the following code from {path}:
```
{code}
```
Based on the following feedback:
```
{feedback}
```

File path: {path}

{boundary}
"#,
        path = path,
        code = code,
        feedback = feedback,
        boundary = FILE_BOUNDARY
    )
}

/// Generate a test file covering one source file.
pub fn test_prompt(path: &str, code: &str) -> String {
    format!(
        r#"You are a senior software tester. Analyze the following module from {path}:
```
{code}
```
Generate a complete test file for it using a standard testing framework for
the module's language. Cover core functionality, error handling, and edge
cases.

{boundary}
"#,
        path = path,
        code = code,
        boundary = FILE_BOUNDARY
    )
}
