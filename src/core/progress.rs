//! Terminal progress bar for the render loop. A single mutex guards the
//! counter; workers touch it once per row, so contention is negligible.

// std
use std::io::Write;
use std::sync::Mutex;

const BAR_LEN: usize = 100;

pub struct ProgressBar {
    state: Mutex<State>,
    total_inv: f32,
}

struct State {
    current: usize,
    done_len: usize,
}

impl ProgressBar {
    pub fn new(total: usize) -> Self {
        ProgressBar {
            state: Mutex::new(State {
                current: 0,
                done_len: 0,
            }),
            total_inv: 1.0 / total as f32,
        }
    }

    pub fn increase(&self) {
        let mut state = self.state.lock().unwrap();
        state.current += 1;
        let done_ratio = state.current as f32 * self.total_inv;
        let new_done_len = (done_ratio * BAR_LEN as f32) as usize;
        if new_done_len == state.done_len {
            return;
        }
        state.done_len = new_done_len;

        let done = "=".repeat(new_done_len.min(BAR_LEN));
        let remain = "-".repeat(BAR_LEN - new_done_len.min(BAR_LEN));
        print!("[{}{}] {} %\r", done, remain, (done_ratio * 100.0) as u32);
        let _ = std::io::stdout().flush();
    }

    pub fn finish(&self) {
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_to_total() {
        let bar = ProgressBar::new(10);
        for _ in 0..10 {
            bar.increase();
        }
        let state = bar.state.lock().unwrap();
        assert_eq!(state.current, 10);
        assert_eq!(state.done_len, BAR_LEN);
    }
}
