/*
Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use std::io::{self, Read, Write};

use anyhow::{Context, Result};
use dcpuir::translate;

fn main() -> Result<()> {
    env_logger::init();

    let mut source = String::new();
    io::stdin()
        .read_to_string(&mut source)
        .context("Failed to read assembly from stdin")?;

    let ir = translate(&source).context("Failed during translation")?;

    io::stdout()
        .write_all(ir.as_bytes())
        .context("Failed to write IR to stdout")?;

    Ok(())
}
