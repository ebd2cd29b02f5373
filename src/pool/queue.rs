//! # Cola Compartida de Tareas
//! src/pool/queue.rs
//!
//! Implementa la cola FIFO thread-safe que comparten los workers y quienes
//! envían tareas. Todo el estado mutable compartido (cola, bandera `stopping`,
//! contadores de workers) vive detrás de un único `Mutex`; las notificaciones
//! usan `Condvar`s sobre ese mismo mutex.

use crate::pool::error::PoolError;
use crate::pool::types::{FullPolicy, Job, ShutdownMode};
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Estado protegido por el mutex
struct QueueState {
    /// Tareas pendientes (todavía no reclamadas)
    tasks: VecDeque<Job>,

    /// Una vez `true`, nunca vuelve a `false`
    stopping: bool,

    /// Workers que entraron a su loop
    started: usize,

    /// Workers que alcanzaron la transición terminal
    exited: usize,

    /// Workers ejecutando una tarea en este momento
    busy: usize,
}

/// Cola FIFO compartida con soporte de shutdown
pub(crate) struct TaskQueue {
    state: Mutex<QueueState>,

    /// Workers esperando trabajo (notify_one al encolar, notify_all al cerrar)
    work_available: Condvar,

    /// Submitters bloqueados por una cola acotada llena
    space_available: Condvar,

    /// Arranque y salida de workers
    lifecycle: Condvar,

    /// Capacidad máxima (`None` = sin límite)
    capacity: Option<usize>,

    policy: FullPolicy,
}

impl TaskQueue {
    /// Crea una nueva cola vacía
    pub fn new(capacity: Option<usize>, policy: FullPolicy) -> Self {
        Self {
            state: Mutex::new(QueueState {
                tasks: VecDeque::new(),
                stopping: false,
                started: 0,
                exited: 0,
                busy: 0,
            }),
            work_available: Condvar::new(),
            space_available: Condvar::new(),
            lifecycle: Condvar::new(),
            capacity,
            policy,
        }
    }

    // Las tareas nunca corren con el lock tomado, así que un mutex envenenado
    // no deja el estado a medias.
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Encola una tarea al final
    ///
    /// Falla con `PoolClosed` apenas `stopping` está activo, y con `QueueFull`
    /// si la cola acotada está llena y la política es `Reject`.
    pub fn enqueue(&self, job: Job) -> Result<(), PoolError> {
        let mut state = self.lock();

        if state.stopping {
            return Err(PoolError::PoolClosed);
        }

        if let Some(capacity) = self.capacity {
            match self.policy {
                FullPolicy::Reject => {
                    if state.tasks.len() >= capacity {
                        return Err(PoolError::QueueFull { capacity });
                    }
                }
                FullPolicy::Block => {
                    state = self
                        .space_available
                        .wait_while(state, |s| !s.stopping && s.tasks.len() >= capacity)
                        .unwrap_or_else(PoisonError::into_inner);

                    if state.stopping {
                        return Err(PoolError::PoolClosed);
                    }
                }
            }
        }

        state.tasks.push_back(job);
        drop(state);

        // Una tarea nueva necesita a lo sumo un worker nuevo
        self.work_available.notify_one();

        Ok(())
    }

    /// Reclama la siguiente tarea, bloqueando hasta que haya una
    ///
    /// Retorna `None` únicamente cuando `stopping` está activo y la cola está
    /// vacía: esa es la transición terminal del worker.
    pub fn claim(&self) -> Option<Job> {
        let state = self.lock();
        let mut state = self
            .work_available
            .wait_while(state, |s| s.tasks.is_empty() && !s.stopping)
            .unwrap_or_else(PoisonError::into_inner);

        match state.tasks.pop_front() {
            Some(job) => {
                state.busy += 1;
                drop(state);

                if self.capacity.is_some() {
                    self.space_available.notify_one();
                }

                Some(job)
            }
            None => None,
        }
    }

    /// Marca que un worker terminó la tarea que había reclamado
    pub fn task_done(&self) {
        let mut state = self.lock();
        state.busy = state.busy.saturating_sub(1);
    }

    /// Registra que un worker entró a su loop
    pub fn worker_started(&self) {
        let mut state = self.lock();
        state.started += 1;
        drop(state);
        self.lifecycle.notify_all();
    }

    /// Registra que un worker alcanzó su transición terminal
    pub fn worker_exited(&self) {
        let mut state = self.lock();
        state.exited += 1;
        drop(state);
        self.lifecycle.notify_all();
    }

    /// Espera hasta que `count` workers hayan arrancado
    pub fn wait_started(&self, count: usize) {
        let state = self.lock();
        let _state = self
            .lifecycle
            .wait_while(state, |s| s.started < count)
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Espera hasta que `count` workers hayan terminado
    pub fn wait_exited(&self, count: usize) {
        let state = self.lock();
        let _state = self
            .lifecycle
            .wait_while(state, |s| s.exited < count)
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Activa `stopping` y despierta a todos
    ///
    /// Retorna `None` si la cola ya estaba cerrada. Si no, retorna las tareas
    /// descartadas (vacío en modo `Drain`) para que quien llama las suelte
    /// fuera del lock.
    pub fn close(&self, mode: ShutdownMode) -> Option<VecDeque<Job>> {
        let mut state = self.lock();

        if state.stopping {
            return None;
        }

        state.stopping = true;

        let abandoned = match mode {
            ShutdownMode::Abandon => std::mem::take(&mut state.tasks),
            ShutdownMode::Drain => VecDeque::new(),
        };

        drop(state);

        // Despertar a TODOS: con la cola vacía, un solo notify dejaría
        // workers bloqueados para siempre
        self.work_available.notify_all();
        self.space_available.notify_all();
        self.lifecycle.notify_all();

        Some(abandoned)
    }

    /// Retorna el tamaño actual de la cola
    pub fn len(&self) -> usize {
        self.lock().tasks.len()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().stopping
    }

    /// Retorna la capacidad máxima
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Workers vivos (arrancados y no terminados)
    pub fn live(&self) -> usize {
        let state = self.lock();
        state.started - state.exited
    }

    /// Obtiene (encoladas, vivos, ocupados, cerrada) en una sola toma del lock
    pub fn snapshot(&self) -> QueueSnapshot {
        let state = self.lock();
        QueueSnapshot {
            queued: state.tasks.len(),
            live: state.started - state.exited,
            busy: state.busy,
            closed: state.stopping,
        }
    }
}

/// Vista consistente del estado de la cola
#[derive(Debug, Clone, Copy)]
pub(crate) struct QueueSnapshot {
    pub queued: usize,
    pub live: usize,
    pub busy: usize,
    pub closed: bool,
}
