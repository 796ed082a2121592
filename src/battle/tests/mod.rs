pub mod common;

#[cfg(test)]
mod test_session_lifecycle;



#[cfg(test)]
mod test_status_effects;
