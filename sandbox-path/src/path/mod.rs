pub mod safe_path;

#[cfg(test)]
mod tests;
